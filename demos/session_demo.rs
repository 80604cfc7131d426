//! Full session walkthrough: start chromedriver, open a headless session,
//! open extra tabs, collapse the window set back to one, release.
//!
//! Prerequisites:
//! - chromedriver on PATH (matching the installed Chrome)
//! - Chrome/Chromium installed
//!
//! Run with:
//! ```bash
//! cargo run --example session_demo
//! ```

use chrome_session::{DriverService, SessionConfig};

const PORT: u16 = 9515;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let service = DriverService::start("chromedriver", PORT).await?;
    println!("chromedriver ready at {}", service.url());

    let mut session = SessionConfig::new(PORT).headless().open().await?;

    let driver = session.driver()?;
    driver.goto("https://example.com/").await?;
    println!("Loaded: {}", driver.title().await?);

    // Scatter some tabs, then reset to a single window.
    driver.new_tab().await?;
    driver.new_tab().await?;
    println!("Open windows: {}", driver.windows().await?.len());

    session.close_other_windows().await?;
    println!(
        "After cleanup: {}",
        session.driver()?.windows().await?.len()
    );

    session.release().await;
    service.stop().await?;
    Ok(())
}
