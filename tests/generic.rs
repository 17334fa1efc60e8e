#[cfg(test)]
mod tests {
    use stencil::GenericSqlWriter;
    use stencil_tests::{execute_tests, init_logs};

    #[tokio::test]
    async fn generic() {
        init_logs();
        execute_tests(GenericSqlWriter::new()).await;
    }
}
