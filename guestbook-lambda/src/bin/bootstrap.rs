use guestbook::{
    config::Settings,
    telemetry::{self, LogTarget},
    App,
};
use guestbook_lambda::{
    lambda::{self, Error},
    GuestbookHandler,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let settings = Settings::load();
    telemetry::init(&settings.log_filter, LogTarget::Lambda);

    // built once per execution environment and shared by every invocation
    let app = App::from_settings(&settings).await?;
    lambda::run(GuestbookHandler::new(Arc::new(app))).await
}
