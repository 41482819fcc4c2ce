use clap::Parser;

use affiliateaura::cli::{Cli, Commands};
use affiliateaura::config::{StaticConfig, get_config, init_config_from};
use affiliateaura::errors::AuraError;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(&cli.config);

    match cli.command {
        Some(Commands::GenerateConfig { output_path }) => generate_config(output_path),
        Some(Commands::IssueToken { email, name }) => issue_token(&email, name.as_deref()),
        Some(Commands::Serve) | None => serve().await,
    }
}

fn generate_config(output_path: Option<String>) -> std::io::Result<()> {
    match output_path {
        Some(path) => {
            if let Err(e) = StaticConfig::sample().save_to_file(&path) {
                let err = AuraError::file_operation(format!("{}: {}", path, e));
                eprintln!("{}", err.format_colored());
                std::process::exit(1);
            }
            println!("Sample configuration written to {}", path);
        }
        None => println!("{}", StaticConfig::generate_sample_config()),
    }
    Ok(())
}

fn issue_token(email: &str, name: Option<&str>) -> std::io::Result<()> {
    if !email.contains('@') {
        eprintln!(
            "{}",
            AuraError::validation(format!("Invalid email address: {}", email)).format_colored()
        );
        std::process::exit(1);
    }

    // 随机密钥只在本进程有效，签出的 token 服务端无法验证
    if get_config().auth.jwt_secret.trim().is_empty() {
        eprintln!(
            "{}",
            AuraError::validation("auth.jwt_secret is not set; configure it before issuing tokens")
                .format_colored()
        );
        std::process::exit(1);
    }

    match affiliateaura::api::jwt::get_jwt_service().issue_token(email, name) {
        Ok(token) => {
            println!("{}", token);
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "{}",
                AuraError::serialization(format!("Failed to sign token: {}", e)).format_colored()
            );
            std::process::exit(1);
        }
    }
}

async fn serve() -> std::io::Result<()> {
    let config = get_config();

    // guard 必须活到进程结束，日志才会刷盘
    let _log_guard = match affiliateaura::system::logging::init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = affiliateaura::runtime::modes::run_server().await {
        match e.downcast_ref::<AuraError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("Server error: {:#}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}
