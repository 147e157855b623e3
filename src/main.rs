#[tokio::main]
async fn main() {
    if let Err(e) = ambulance_dispatch::run().await {
        tracing::error!("{e}");
        eprintln!("ambulance-dispatch: {e}");
        std::process::exit(1);
    }
}
