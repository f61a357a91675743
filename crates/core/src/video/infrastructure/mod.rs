pub mod image_sequence_source;
