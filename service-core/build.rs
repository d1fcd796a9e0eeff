use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_root = PathBuf::from("../proto");

    // Tell cargo to recompile if any proto files change
    println!("cargo:rerun-if-changed=../proto/billing/");
    println!("cargo:rerun-if-changed=../proto/patient/events/");

    // Compile billing service protos (client-side)
    tonic_build::configure()
        .build_server(false) // Server code lives in billing-service
        .build_client(true) // Build clients for calling billing-service
        .compile_protos(&["../proto/billing/billing_service.proto"], &[&proto_root])?;

    // Compile patient event schema (messages only)
    tonic_build::configure()
        .build_server(false)
        .build_client(false)
        .compile_protos(
            &["../proto/patient/events/patient_event.proto"],
            &[&proto_root],
        )?;

    Ok(())
}
