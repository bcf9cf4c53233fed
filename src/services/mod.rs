pub(crate) mod execution;
pub(crate) mod openai_client;
