use anyhow::Context;
use perch_core::{Runtime, StyleTable};
use perch_navigation::default_router;

mod session;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let styles = StyleTable::from_json(include_str!("../styles.json")).context("parsing styles.json")?;
    let mut rt = Runtime::with_styles(styles);
    let mut router = default_router();

    // PERCH_REALTIME=1 paces waits by the wall clock instead of jumping.
    let realtime = std::env::var_os("PERCH_REALTIME").is_some();
    session::play(&mut rt, &mut router, session::script(), realtime)?;

    router.close(&mut rt)?;
    log::info!(
        "session over: {} mounted, {} timers pending",
        rt.mounted(),
        rt.timers().pending()
    );
    Ok(())
}
