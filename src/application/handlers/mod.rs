pub mod job_processor;
