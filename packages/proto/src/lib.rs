//! Example gRPC service used to exercise the mock server end to end.

pub mod example {
    tonic::include_proto!("example");
}
