pub mod list_table;
