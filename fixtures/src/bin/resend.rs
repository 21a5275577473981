use clap::Parser;
use fixtures::{resend_router, run_server, FixtureArgs, ResendFixture};

/// Mock transactional-mail API
#[derive(Parser, Debug)]
#[clap(name = "resend-fixture")]
struct Cli {
    #[clap(flatten)]
    common: FixtureArgs,

    /// Answer every send with this status instead of accepting it
    #[arg(long)]
    fail_with: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let fixture = match args.fail_with {
        Some(status) => ResendFixture::failing(status),
        None => ResendFixture::new(),
    };

    run_server(args.common, resend_router(fixture)).await
}
