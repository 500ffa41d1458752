// Generates the transaction.purchases.v1 message types, the
// PurchasesService client and the server trait used by in-process tests.
// Output stays in OUT_DIR and is included by `generated` in lib.rs.

fn main() {
    // Use vendored protoc from protobuf-src
    std::env::set_var("PROTOC", protobuf_src::protoc());

    compile_protos();

    // Rebuild when protobuf files change
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=protos/");
}

fn compile_protos() {
    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true) // Server stubs back the in-process test doubles
        .compile_protos(
            &["protos/transaction/purchases/v1/purchases.proto"],
            &["protos/"],
        )
        .unwrap_or_else(|e| panic!("Failed to compile protos: {}", e));
}
