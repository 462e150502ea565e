//! Runs one gateway event file through the Lambda pipeline against an
//! in-memory store and prints the response the function would return.
//!
//! ```sh
//! cargo run -p guestbook_lambda --example invoke-event -- guestbook-lambda/tests/data/apigw_v2_submit.json
//! ```

use guestbook::{
    config::Diagnostics,
    store::{MemoryStore, StoreHandle},
    volume::VolumeMarker,
    App,
};
use guestbook_lambda::{dispatch, lambda::Error};
use serde_json::Value;
use std::{env, fs::File, sync::Arc};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let path = env::args()
        .nth(1)
        .ok_or("usage: invoke-event <event.json>")?;
    let event: Value = serde_json::from_reader(File::open(path)?)?;

    let app = App::new(
        Diagnostics::from_env(),
        StoreHandle::fixed(Arc::new(MemoryStore::new())),
        VolumeMarker::new(env::temp_dir().join("guestbook-ids.txt")),
    );
    let response = dispatch(&app, event).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
