//! The `simulado init` command.

use anyhow::Result;

use simulado_providers::config::CONFIG_FILE_NAME;

pub fn execute() -> Result<()> {
    if std::path::Path::new(CONFIG_FILE_NAME).exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE_NAME, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    println!("\nNext steps:");
    println!("  1. Export SIMULADO_GEMINI_KEY or edit {CONFIG_FILE_NAME} with your API key");
    println!("  2. Run: simulado onboard --name \"Seu Nome\" --course Medicina");
    println!("  3. Run: simulado run --subject math --count 5");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# simulado configuration

default_provider = "gemini"
default_model = "gemini-2.5-flash"
# default_temperature = 0.7
# data_dir = "/home/you/.local/share/simulado"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

# Placeholder questions for trying the exam flow without an API key
[providers.offline]
type = "mock"
"#;
