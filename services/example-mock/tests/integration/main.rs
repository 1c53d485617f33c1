mod bidi_test;
mod client_stream_test;
mod helpers;
mod server_stream_test;
mod stub_test;
mod unary_test;
