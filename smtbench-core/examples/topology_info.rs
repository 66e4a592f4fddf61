use smtbench_core::topology;

fn main() {
    // Detect processor topology
    let topology = topology::detect_topology();
    println!("Detected {} physical cores", topology.physical_core_count());
    println!("Detected {} logical units", topology.logical_unit_count());

    // Print each core's hardware threads in sibling order
    for (core_index, core) in topology.cores().iter().enumerate() {
        println!(
            "Core {} (package {}): {} hardware threads ({:?})",
            core_index,
            core.package_id,
            core.unit_count(),
            core.units()
        );
    }
}
