pub mod align_write;
