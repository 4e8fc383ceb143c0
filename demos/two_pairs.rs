use pkmodel::*;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pkmodel=debug")),
        )
        .with_target(false)
        .init();

    let iv = Model::builder(DeliveryRoute::Intravenous)
        .v_c(1.0)
        .cl(1.0)
        .peripheral(1.0, 1.0)
        .build()?;
    let sc = Model::builder(DeliveryRoute::Subcutaneous)
        .v_c(1.0)
        .cl(1.0)
        .k_a(1.0)
        .peripheral(1.0, 1.0)
        .build()?;

    // One dose per day over three days
    let daily = Protocol::new(
        DoseSchedule::Periodic {
            start: 0.0,
            period: 24.0,
            duration: 1.0,
            rate: 10.0,
        },
        0.0,
        72.0,
    )?;

    let mut solution = Solution::new();
    solution.add(iv, daily.clone())?;
    solution.add(sc, daily)?;

    for (model, protocol) in solution.list_pairs() {
        println!(
            "# {} model, {} peripheral compartment(s), {} h",
            model.route(),
            model.peripherals().len(),
            protocol.time_span()
        );
    }

    let figure = solution.visualise(Layout::SideBySide, 145)?;
    let mut renderer = CsvRenderer::new(std::io::stdout());
    renderer.render(&figure)?;
    renderer.into_inner()?;

    Ok(())
}
