//! Assertion helpers for `TestMine` integration tests.

use super::TestMine;

impl TestMine {
    pub fn assert_water_level(&self, expected: u8) {
        let level = self.environment().water_level();
        assert_eq!(
            level, expected,
            "Expected water level {expected}, got {level} ({})",
            self.environment().print_environment()
        );
    }

    pub fn assert_pump_running(&self, expected: bool) {
        let running = self.pump().is_pump_running();
        assert_eq!(
            running,
            expected,
            "Expected pump running = {expected}, got {}",
            self.pump().print_pump()
        );
    }

    pub fn assert_system_active(&self, expected: bool) {
        let active = self.pump().is_system_active();
        assert_eq!(
            active,
            expected,
            "Expected system active = {expected}, got {}",
            self.pump().print_pump()
        );
    }

    /// Assert the PostSim validator never reported a broken invariant.
    pub fn assert_no_invariant_violations(&self) {
        let violations = self.violations();
        assert_eq!(
            violations.total(),
            0,
            "Expected no invariant violations, got {violations:?}"
        );
    }
}
