//! JID to phone number resolution.

use crate::error::ResolveError;
use crate::jid::{has_lid_suffix, JidKind};
use crate::lookup::LidLookup;
use crate::mapping::ReverseMappingStore;
use crate::normalize::{to_whatsapp_jid, PhoneNormalizer};
use crate::paths::MappingDirectoryResolver;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Per-call resolution options.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Auth directory of the account doing the lookup; searched first.
    pub auth_dir: Option<PathBuf>,
    /// Additional mapping directories, searched after `auth_dir`.
    pub lid_mapping_dirs: Vec<PathBuf>,
    /// Force (`Some(true)`) or suppress (`Some(false)`) the missing-mapping
    /// diagnostic. `None` follows the resolver's verbose setting.
    pub log_missing: Option<bool>,
}

impl ResolveOptions {
    pub fn with_auth_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.auth_dir = Some(dir.into());
        self
    }

    pub fn with_mapping_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lid_mapping_dirs.push(dir.into());
        self
    }

    pub fn with_log_missing(mut self, log_missing: bool) -> Self {
        self.log_missing = Some(log_missing);
        self
    }
}

/// Resolves JIDs to E.164 phone numbers.
///
/// Phone-bearing JIDs decode directly. Linked identifiers go through the local
/// reverse mappings first and, when configured, a live [`LidLookup`].
#[derive(Clone)]
pub struct JidResolver {
    dirs: MappingDirectoryResolver,
    store: ReverseMappingStore,
    normalizer: Arc<dyn PhoneNormalizer>,
    lookup: Option<Arc<dyn LidLookup>>,
    verbose: bool,
}

impl JidResolver {
    /// Create a resolver with local mappings only.
    pub fn new(dirs: MappingDirectoryResolver, normalizer: Arc<dyn PhoneNormalizer>) -> Self {
        Self {
            dirs,
            store: ReverseMappingStore::new(normalizer.clone()),
            normalizer,
            lookup: None,
            verbose: false,
        }
    }

    /// Enable live lookups for unmapped LIDs.
    pub fn with_lookup(mut self, lookup: Arc<dyn LidLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Emit verbose diagnostics for misses and lookup failures.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Whether a live lookup capability is configured.
    pub fn has_lookup(&self) -> bool {
        self.lookup.is_some()
    }

    /// Convert a phone number to a user JID.
    pub fn to_jid(&self, number: &str) -> Result<String, ResolveError> {
        to_whatsapp_jid(number, self.normalizer.as_ref())
    }

    /// Decode a JID without network access.
    ///
    /// LIDs are looked up in the reverse-mapping files of every candidate
    /// directory.
    pub fn jid_to_e164(&self, jid: &str, opts: &ResolveOptions) -> Option<String> {
        match JidKind::parse(jid) {
            JidKind::Phone(digits) => Some(format!("+{}", digits)),
            JidKind::Lid(lid) => {
                let dirs = self
                    .dirs
                    .resolve(opts.auth_dir.as_deref(), &opts.lid_mapping_dirs);
                let phone = self.store.read_reverse(lid, &dirs);

                if phone.is_none() && opts.log_missing.unwrap_or(self.verbose) {
                    info!("LID mapping not found for {}", lid);
                }
                phone
            }
            JidKind::Other => None,
        }
    }

    /// Resolve a JID to a phone number, falling back to the live lookup for
    /// unmapped LIDs. Never fails; unknown identities are `None`.
    #[instrument(skip(self, opts))]
    pub async fn resolve(&self, jid: &str, opts: &ResolveOptions) -> Option<String> {
        if jid.is_empty() {
            return None;
        }

        if let Some(phone) = self.jid_to_e164(jid, opts) {
            return Some(phone);
        }

        if !has_lid_suffix(jid) {
            return None;
        }

        let lookup = self.lookup.as_ref()?;

        let pn_jid = match lookup.lookup_pn(jid).await {
            Ok(Some(pn_jid)) => pn_jid,
            Ok(None) => {
                debug!("Live lookup has no mapping for {}", jid);
                return None;
            }
            Err(e) => {
                if self.verbose {
                    info!("LID lookup failed for {}: {}", jid, e);
                }
                return None;
            }
        };

        self.jid_to_e164(&pn_jid, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use crate::lookup::MockLidLookup;
    use crate::mapping::reverse_mapping_file_name;
    use crate::normalize::E164Normalizer;
    use crate::paths::CredentialPaths;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn create_test_resolver(config_dir: &TempDir) -> JidResolver {
        let paths = CredentialPaths::new(config_dir.path());
        JidResolver::new(
            MappingDirectoryResolver::new(paths),
            Arc::new(E164Normalizer),
        )
    }

    fn write_mapping(dir: &std::path::Path, lid: &str, contents: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(reverse_mapping_file_name(lid)), contents).unwrap();
    }

    /// Collects formatted log output written by a test subscriber.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under a scoped fmt subscriber and return what it logged.
    fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, f);
        let output = String::from_utf8_lossy(&logs.0.lock().unwrap()).into_owned();
        (result, output)
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_jid_to_e164_direct() {
        let config_dir = TempDir::new().unwrap();
        let resolver = create_test_resolver(&config_dir);
        let opts = ResolveOptions::default();

        assert_eq!(
            resolver.jid_to_e164("15551234567:4@s.whatsapp.net", &opts),
            Some("+15551234567".into())
        );
        assert_eq!(
            resolver.jid_to_e164("15551234567@hosted", &opts),
            Some("+15551234567".into())
        );
        assert_eq!(resolver.jid_to_e164("123@g.us", &opts), None);
    }

    #[test]
    fn test_jid_to_e164_lid_from_default_credentials() {
        let config_dir = TempDir::new().unwrap();
        write_mapping(
            &config_dir.path().join("credentials"),
            "55512",
            r#""15551234567""#,
        );
        let resolver = create_test_resolver(&config_dir);

        assert_eq!(
            resolver.jid_to_e164("55512@lid", &ResolveOptions::default()),
            Some("+15551234567".into())
        );
        assert_eq!(
            resolver.jid_to_e164("55512:3@hosted.lid", &ResolveOptions::default()),
            Some("+15551234567".into())
        );
    }

    #[test]
    fn test_jid_to_e164_lid_missing() {
        let config_dir = TempDir::new().unwrap();
        let resolver = create_test_resolver(&config_dir).with_verbose(true);

        assert_eq!(resolver.jid_to_e164("55512@lid", &ResolveOptions::default()), None);
        assert_eq!(
            resolver.jid_to_e164(
                "55512@lid",
                &ResolveOptions::default().with_log_missing(false)
            ),
            None
        );
    }

    #[test]
    fn test_missing_mapping_logged_when_verbose() {
        let config_dir = TempDir::new().unwrap();
        let resolver = create_test_resolver(&config_dir).with_verbose(true);

        let (phone, logs) =
            capture_logs(|| resolver.jid_to_e164("55512@lid", &ResolveOptions::default()));

        assert_eq!(phone, None);
        assert!(logs.contains("LID mapping not found for 55512"));
    }

    #[test]
    fn test_missing_mapping_quiet_by_default() {
        let config_dir = TempDir::new().unwrap();
        let resolver = create_test_resolver(&config_dir);

        let (_, logs) =
            capture_logs(|| resolver.jid_to_e164("55512@lid", &ResolveOptions::default()));

        assert!(!logs.contains("LID mapping not found"));
    }

    #[test]
    fn test_missing_mapping_log_suppressed_by_option() {
        let config_dir = TempDir::new().unwrap();
        let resolver = create_test_resolver(&config_dir).with_verbose(true);
        let opts = ResolveOptions::default().with_log_missing(false);

        let (_, logs) = capture_logs(|| resolver.jid_to_e164("55512@lid", &opts));

        assert!(!logs.contains("LID mapping not found"));
    }

    #[test]
    fn test_missing_mapping_log_forced_by_option() {
        let config_dir = TempDir::new().unwrap();
        let resolver = create_test_resolver(&config_dir);
        let opts = ResolveOptions::default().with_log_missing(true);

        let (_, logs) = capture_logs(|| resolver.jid_to_e164("55512@lid", &opts));

        assert!(logs.contains("LID mapping not found for 55512"));
    }

    #[test]
    fn test_lookup_failure_logged_when_verbose() {
        let config_dir = TempDir::new().unwrap();
        let mut lookup = MockLidLookup::new();
        lookup
            .expect_lookup_pn()
            .returning(|_| Err(LookupError::Failed("connection reset".into())));
        let lookup: Arc<dyn LidLookup> = Arc::new(lookup);

        let verbose = create_test_resolver(&config_dir)
            .with_lookup(lookup.clone())
            .with_verbose(true);
        let (phone, logs) = capture_logs(|| {
            block_on(verbose.resolve("55512@lid", &ResolveOptions::default()))
        });
        assert_eq!(phone, None);
        assert!(logs.contains("LID lookup failed for 55512@lid: Lookup failed: connection reset"));

        let quiet = create_test_resolver(&config_dir).with_lookup(lookup);
        let (_, logs) = capture_logs(|| {
            block_on(quiet.resolve("55512@lid", &ResolveOptions::default()))
        });
        assert!(!logs.contains("LID lookup failed"));
    }

    #[test]
    fn test_short_number_mapping_matches_direct_decode() {
        let config_dir = TempDir::new().unwrap();
        write_mapping(
            &config_dir.path().join("credentials"),
            "777",
            r#""298123456""#,
        );
        let resolver = create_test_resolver(&config_dir);
        let opts = ResolveOptions::default();

        assert_eq!(
            resolver.jid_to_e164("777@lid", &opts),
            Some("+298123456".into())
        );
        assert_eq!(
            resolver.jid_to_e164("777@lid", &opts),
            resolver.jid_to_e164("298123456@s.whatsapp.net", &opts)
        );
    }

    #[test]
    fn test_round_trip() {
        let config_dir = TempDir::new().unwrap();
        let resolver = create_test_resolver(&config_dir);
        let opts = ResolveOptions::default();

        for raw in ["+1 (555) 123-4567", "447700900123", "whatsapp:+4930123456"] {
            let jid = resolver.to_jid(raw).unwrap();
            assert_eq!(
                resolver.jid_to_e164(&jid, &opts),
                Some(E164Normalizer.normalize(raw).unwrap())
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_empty() {
        let config_dir = TempDir::new().unwrap();
        let mut lookup = MockLidLookup::new();
        lookup.expect_lookup_pn().never();
        let resolver = create_test_resolver(&config_dir).with_lookup(Arc::new(lookup));

        assert_eq!(resolver.resolve("", &ResolveOptions::default()).await, None);
    }

    #[tokio::test]
    async fn test_resolve_uses_live_lookup() {
        let config_dir = TempDir::new().unwrap();
        let mut lookup = MockLidLookup::new();
        lookup
            .expect_lookup_pn()
            .withf(|jid: &str| jid == "55512@lid")
            .times(1)
            .returning(|_| Ok(Some("15557654321:2@s.whatsapp.net".into())));
        let resolver = create_test_resolver(&config_dir).with_lookup(Arc::new(lookup));

        assert_eq!(
            resolver.resolve("55512@lid", &ResolveOptions::default()).await,
            Some("+15557654321".into())
        );
    }

    #[tokio::test]
    async fn test_resolve_prefers_local_mapping() {
        let config_dir = TempDir::new().unwrap();
        write_mapping(&config_dir.path().join("credentials"), "55512", "15551234567");
        let mut lookup = MockLidLookup::new();
        lookup.expect_lookup_pn().never();
        let resolver = create_test_resolver(&config_dir).with_lookup(Arc::new(lookup));

        assert_eq!(
            resolver.resolve("55512@lid", &ResolveOptions::default()).await,
            Some("+15551234567".into())
        );
    }

    #[tokio::test]
    async fn test_resolve_absorbs_lookup_failure() {
        let config_dir = TempDir::new().unwrap();
        let mut lookup = MockLidLookup::new();
        lookup
            .expect_lookup_pn()
            .times(1)
            .returning(|_| Err(LookupError::Failed("connection reset".into())));
        let resolver = create_test_resolver(&config_dir)
            .with_lookup(Arc::new(lookup))
            .with_verbose(true);

        assert_eq!(
            resolver.resolve("55512@lid", &ResolveOptions::default()).await,
            None
        );
    }

    #[tokio::test]
    async fn test_resolve_lookup_returns_nothing() {
        let config_dir = TempDir::new().unwrap();
        let mut lookup = MockLidLookup::new();
        lookup.expect_lookup_pn().times(1).returning(|_| Ok(None));
        let resolver = create_test_resolver(&config_dir).with_lookup(Arc::new(lookup));

        assert_eq!(
            resolver.resolve("55512@hosted.lid", &ResolveOptions::default()).await,
            None
        );
    }

    #[tokio::test]
    async fn test_resolve_lookup_returns_unresolvable_jid() {
        let config_dir = TempDir::new().unwrap();
        let mut lookup = MockLidLookup::new();
        lookup
            .expect_lookup_pn()
            .times(1)
            .returning(|_| Ok(Some("99999@lid".into())));
        let resolver = create_test_resolver(&config_dir).with_lookup(Arc::new(lookup));

        assert_eq!(
            resolver.resolve("55512@lid", &ResolveOptions::default()).await,
            None
        );
    }

    #[tokio::test]
    async fn test_resolve_skips_lookup_for_non_lid() {
        let config_dir = TempDir::new().unwrap();
        let mut lookup = MockLidLookup::new();
        lookup.expect_lookup_pn().never();
        let resolver = create_test_resolver(&config_dir).with_lookup(Arc::new(lookup));

        assert_eq!(
            resolver
                .resolve("120363025246125244@g.us", &ResolveOptions::default())
                .await,
            None
        );
        assert_eq!(
            resolver.resolve("status@broadcast", &ResolveOptions::default()).await,
            None
        );
    }

    #[tokio::test]
    async fn test_resolve_without_lookup() {
        let config_dir = TempDir::new().unwrap();
        let resolver = create_test_resolver(&config_dir);

        assert!(!resolver.has_lookup());
        assert_eq!(
            resolver.resolve("55512@lid", &ResolveOptions::default()).await,
            None
        );
    }
}
