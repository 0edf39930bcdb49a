pub mod packet;
pub mod reader;
