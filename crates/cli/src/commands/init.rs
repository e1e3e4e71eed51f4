use crate::commands::{connect, current_thread_runtime, CommandFailure, CommandResult};
use quotebox_core::config::{AppConfig, LoadOptions};
use quotebox_db::schema;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "init",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(message) => return CommandResult::failure("init", "runtime_init", message, 3),
    };

    let result = runtime.block_on(async {
        let pool = connect(&config).await?;
        let outcome = schema::ensure(&pool)
            .await
            .map_err(|error| ("schema", error.to_string(), 5u8));
        pool.close().await;
        outcome?;
        Ok::<(), CommandFailure>(())
    });

    match result {
        Ok(()) => CommandResult::success("init", "quotes schema is ready"),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("init", error_class, message, exit_code)
        }
    }
}
