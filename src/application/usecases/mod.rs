pub mod send_bulk;
