pub mod prompt_loader;

pub use prompt_loader::load_system_prompt;
