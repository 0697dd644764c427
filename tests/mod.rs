
// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - smoke_tests: Loaders, config and reporting against real files
// - google_calendar_mock: The cleanup and upsert run against an in-memory calendar
// - google_calendar_http: The REST client and token refresh against a fake Google
