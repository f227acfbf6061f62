//! Mock topology example: containers inside containers, no procfs needed

use nstree_core::NamespaceId;
use nstree_namespace::{
    DiscoveryConfig, MockTopology, PidMembership, TreeRenderer, UnreadablePolicy, discover,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let init = NamespaceId::new(4, 4_026_531_836);
    let container = NamespaceId::new(4, 4_026_532_210);
    let nested = NamespaceId::new(4, 4_026_532_290);
    let sidecar = NamespaceId::new(4, 4_026_532_350);

    let mut topology = MockTopology::new(init)
        .with_namespace(container, init)
        .with_namespace(nested, container)
        .with_namespace(sidecar, init)
        .with_process(1, init)
        .with_process(2, init)
        .with_process(2210, container)
        .with_nested_pids(2210, &[2210, 1])
        .with_process(2290, nested)
        .with_nested_pids(2290, &[2290, 14, 1])
        .with_process(2350, sidecar)
        .with_exited(2350)
        .with_vanished(9999);

    for pid in 3000..3030 {
        topology = topology.with_process(pid, init);
    }

    let config = DiscoveryConfig::new().with_unreadable(UnreadablePolicy::Skip);
    let discovery = discover(&topology, config)?;

    let resolver = PidMembership::new(&topology);
    print!(
        "{}",
        TreeRenderer::new(&discovery.registry, &resolver).render_to_string(&discovery.report)
    );

    eprintln!(
        "\n{} namespaces, {} parent queries",
        discovery.registry.len(),
        topology.parent_queries()
    );

    Ok(())
}
