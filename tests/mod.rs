
// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - smoke_tests: Basic functionality tests to ensure nothing is broken
// - google_calendar_http: Paging and token refresh against a local server
// - google_calendar_mock: Mocking the Google Calendar API for full exports
// - org_render: Rendered org-mode output of realistic event series
