pub mod use_data_source;
