use route_admission::{get_settings, run, setup_logger};

fn main() -> anyhow::Result<()> {
    let settings = get_settings()?;
    setup_logger(settings.level.clone(), vec![])?;

    let responses = run(&settings, &mut std::io::stdout().lock())?;
    if responses.iter().any(|response| !response.allowed) {
        std::process::exit(1);
    }
    Ok(())
}
