use procflow::cli::{App, Args};

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    let code = match App::from_args(&args) {
        Ok(mut app) => match app.run(args).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("error {:#}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("error {:#}", e);
            1
        }
    };

    std::process::exit(code);
}
