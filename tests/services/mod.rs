mod test_generate;
mod test_mark;
mod test_migrate;
mod test_status;
