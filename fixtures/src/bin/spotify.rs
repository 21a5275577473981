use clap::Parser;
use fixtures::{run_server, spotify_router, FixtureArgs, SpotifyFixture};
use serde_json::json;

/// Mock Spotify accounts + API host
#[derive(Parser, Debug)]
#[clap(name = "spotify-fixture")]
struct Cli {
    #[clap(flatten)]
    common: FixtureArgs,

    /// Serve a playing track instead of an idle player
    #[arg(long)]
    playing: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let fixture = if args.playing {
        SpotifyFixture::playing(json!({
            "is_playing": true,
            "item": {
                "name": "Fixture Song",
                "artists": [{ "name": "Fixture Artist" }],
                "external_urls": { "spotify": "https://open.spotify.com/track/fixture" },
                "album": { "images": [{ "url": "https://i.scdn.co/image/fixture" }] },
            },
        }))
    } else {
        SpotifyFixture::idle()
    };

    run_server(args.common, spotify_router(fixture)).await
}
