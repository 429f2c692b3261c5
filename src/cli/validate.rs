use std::path::PathBuf;

use crate::cli::commands::ValidateArgs;
use crate::config;
use crate::errors::MetricsError;

pub async fn handle_validate(args: ValidateArgs) -> Result<(), MetricsError> {
    let path = PathBuf::from(&args.config);
    let _config = config::parse_config(&path).await?;
    println!("Configuration is valid: {}", args.config);
    Ok(())
}
