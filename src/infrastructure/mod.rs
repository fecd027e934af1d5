pub mod llm_clients;
