use anyhow::Result;
use kattegat_cli::config::KattegatConfig;
use kattegat_scenarios::Topology;
use kattegat_viz::MapView;

pub fn handle(config: &KattegatConfig, width: Option<usize>, height: Option<usize>) -> Result<()> {
    let view = MapView::from_topology(&Topology::danish_triangle());
    print!(
        "{}",
        view.render_ascii(
            width.unwrap_or(config.map.width),
            height.unwrap_or(config.map.height)
        )
    );
    Ok(())
}
