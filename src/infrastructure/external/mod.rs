pub mod dictionary_api;

pub use dictionary_api::DictionaryApiClient;
