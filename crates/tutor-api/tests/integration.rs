mod common;

mod service_tests;
