mod llm_client_test;

// Unit tests for configuration and auth
mod auth_test;
mod config_test;
