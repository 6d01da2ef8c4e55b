//! Sector 77: runs the museum app.

use museum::{config, MuseumBuilder};

fn main() {
    let _ = dotenvy::dotenv();

    MuseumBuilder::new()
        .config(config::museum_config())
        .build()
        .run();
}
