pub mod db;
pub mod hosted;
pub mod openai;
pub mod storage;

pub use db::DbAdapter;
pub use hosted::HostedFunctionsClient;
pub use openai::OpenAiCompletionAdapter;
pub use storage::StorageAdapter;
