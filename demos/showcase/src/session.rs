use perch_core::{Event, Key, Runtime};
use perch_navigation::Router;
use web_time::Duration;

pub enum Step {
    Go(&'static str),
    Back,
    Send(&'static str, Event),
    Wait(Duration),
}

pub fn script() -> Vec<Step> {
    use Step::*;
    let ms = Duration::from_millis;
    vec![
        Go("/"),
        Go("/nowhere"),
        Go("/dashboard"),
        Go("/counter"),
        Send("increment", Event::Click),
        Send("increment", Event::Click),
        Send("decrement", Event::Click),
        Send("toggle", Event::Click),
        Wait(ms(3_000)),
        // Dropped: the counter is running.
        Send("increment", Event::Click),
        Wait(ms(9_000)),
        Send("toggle", Event::Click),
        Wait(ms(1_500)),
        Send("reset", Event::Click),
        Go("/todos"),
        Send("add", Event::Click),
        Send("input", Event::Input("Ship the demo".into())),
        Send("input", Event::KeyPress(Key::Enter)),
        Send("toggle-1", Event::Toggle),
        Send("clear", Event::Click),
        Wait(ms(250)),
        Back,
    ]
}

/// Play `steps`, printing the layout frame after each one.
pub fn play(rt: &mut Runtime, router: &mut Router, steps: Vec<Step>, realtime: bool) -> anyhow::Result<()> {
    for step in steps {
        match step {
            Step::Go(path) => {
                let shown = router.navigate(rt, path)?;
                log::info!("go {path} -> {shown}");
            }
            Step::Back => {
                let moved = router.back(rt)?;
                log::info!("back (moved: {moved})");
            }
            Step::Send(key, event) => {
                log::info!("{} on {key}", event.name());
                // A missed target is reported but does not end the session.
                if let Err(err) = router.dispatch(rt, key, event) {
                    log::warn!("{err}");
                }
            }
            Step::Wait(by) => {
                if realtime {
                    rt.run_for(by);
                } else {
                    let fired = rt.advance(by);
                    log::info!("wait {by:?} ({fired} timers fired)");
                }
            }
        }

        println!(
            "== t={:?} {} ==",
            rt.now(),
            router.current().unwrap_or("-")
        );
        print!("{}", router.frame(rt).render_text());
    }
    Ok(())
}
