use anyhow::Result;
use stride::cli::App;

#[tokio::main]
async fn main() -> Result<()> {
    let mut app = App::from_args().await?;
    let args = stride::cli::Args::parse_args();

    app.run(args).await?;

    Ok(())
}
