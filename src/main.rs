use abusefinder::app::App;
use abusefinder::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::from_args();

    env_logger::Builder::from_default_env()
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .init();

    match App::run(&cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
