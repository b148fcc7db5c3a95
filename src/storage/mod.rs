pub mod traits;
pub mod yaml_file;

pub use traits::ArticleWriter;
pub use yaml_file::YamlFileWriter;
