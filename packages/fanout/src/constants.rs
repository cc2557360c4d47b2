// A poisoned lock means another thread panicked while mutating registry state. The mapping
// may be mid-edit, so continuing is not sound (we panic).
pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock - a thread panicked while \
    updating callback registrations, so the registry contents can no longer be trusted";
