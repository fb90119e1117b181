//! Service identification from banners and well-known port numbers.
//!
//! A [`ServiceCatalog`] owns two immutable tables: banner signatures, checked
//! in order so the first match wins, and the conventional port → service map
//! used when no signature matches.

use crate::types::Port;
use std::collections::HashMap;

/// Where the version token sits relative to a signature's marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRule {
    /// The signature carries no version.
    None,
    /// Token starts right after the marker, e.g. `nginx/1.24.0`.
    After(&'static str),
    /// Dotted number ending right before the marker, e.g. `10.6.12-mariadb`.
    Before(&'static str),
}

/// A banner signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Lowercase substring looked for in the lowercased banner.
    pub pattern: &'static str,
    /// Label reported when the pattern matches.
    pub service: &'static str,
    /// Only match when the banner begins with `pattern`.
    pub anchored: bool,
    /// How to pull a version out of a matching banner.
    pub version: VersionRule,
}

impl Signature {
    pub const fn new(pattern: &'static str, service: &'static str) -> Self {
        Self {
            pattern,
            service,
            anchored: false,
            version: VersionRule::None,
        }
    }

    pub const fn versioned(
        pattern: &'static str,
        service: &'static str,
        marker: &'static str,
    ) -> Self {
        Self {
            version: VersionRule::After(marker),
            ..Self::new(pattern, service)
        }
    }

    /// Version is the dotted number immediately preceding `marker`.
    pub const fn versioned_before(
        pattern: &'static str,
        service: &'static str,
        marker: &'static str,
    ) -> Self {
        Self {
            version: VersionRule::Before(marker),
            ..Self::new(pattern, service)
        }
    }

    /// Require the pattern at the start of the banner.
    pub const fn at_start(self) -> Self {
        Self {
            anchored: true,
            ..self
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        if self.anchored {
            lowered.starts_with(self.pattern)
        } else {
            lowered.contains(self.pattern)
        }
    }
}

/// Built-in signatures, most specific first.
const SIGNATURES: &[Signature] = &[
    // SSH
    Signature::versioned("openssh", "OpenSSH", "openssh_"),
    Signature::versioned("dropbear", "Dropbear SSH", "dropbear_"),
    Signature::versioned("ssh-2.0-", "SSH Server", "ssh-2.0-").at_start(),
    Signature::versioned("ssh-1.99-", "SSH Server", "ssh-1.99-").at_start(),
    Signature::versioned("ssh-1.5-", "SSH Server", "ssh-1.5-").at_start(),
    // FTP
    Signature::versioned("proftpd", "ProFTPD", "proftpd "),
    Signature::versioned("filezilla server", "FileZilla", "filezilla server "),
    Signature::versioned("vsftpd", "vsftpd", "vsftpd "),
    Signature::new("microsoft ftp service", "Microsoft FTP"),
    Signature::versioned("pure-ftpd", "Pure-FTPd", "pure-ftpd "),
    // SMTP
    Signature::new("esmtp postfix", "Postfix"),
    Signature::versioned("esmtp sendmail", "Sendmail", "sendmail "),
    Signature::versioned("esmtp exim", "Exim", "exim "),
    Signature::new("microsoft esmtp mail", "Microsoft Exchange"),
    // HTTP servers, matched on the Server header of a probe response
    Signature::versioned("server: nginx", "nginx", "nginx/"),
    Signature::versioned("server: apache", "Apache", "apache/"),
    Signature::versioned("server: microsoft-iis", "IIS", "microsoft-iis/"),
    Signature::versioned("server: lighttpd", "lighttpd", "lighttpd/"),
    Signature::versioned("server: caddy", "Caddy", "caddy/"),
    // Databases and caches
    Signature::versioned_before("-mariadb", "MariaDB", "-mariadb"),
    Signature::versioned_before("-mysql", "MySQL", "-mysql"),
    Signature::new("mysql_native_password", "MySQL"),
    Signature::versioned("postgresql", "PostgreSQL", "postgresql "),
    Signature::versioned("redis_version:", "Redis", "redis_version:"),
    Signature::new("-err wrong number of arguments", "Redis"),
    // Mail retrieval and remote desktop
    Signature::versioned("dovecot", "Dovecot", "dovecot "),
    Signature::new("+ok", "pop3").at_start(),
    Signature::new("* ok", "imap").at_start(),
    Signature::versioned("rfb ", "vnc", "rfb ").at_start(),
    // Generic HTTP last so named servers win
    Signature::new("http/1.", "http").at_start(),
];

/// Well-known TCP ports.
const PORT_SERVICES: &[(u16, &str)] = &[
    (20, "ftp-data"),
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (53, "dns"),
    (69, "tftp"),
    (80, "http"),
    (88, "kerberos"),
    (110, "pop3"),
    (111, "rpcbind"),
    (119, "nntp"),
    (123, "ntp"),
    (135, "msrpc"),
    (139, "netbios-ssn"),
    (143, "imap"),
    (161, "snmp"),
    (179, "bgp"),
    (194, "irc"),
    (389, "ldap"),
    (443, "https"),
    (445, "smb"),
    (465, "smtps"),
    (513, "rlogin"),
    (514, "syslog"),
    (515, "printer"),
    (548, "afp"),
    (554, "rtsp"),
    (587, "submission"),
    (631, "ipp"),
    (636, "ldaps"),
    (873, "rsync"),
    (993, "imaps"),
    (995, "pop3s"),
    (1080, "socks"),
    (1194, "openvpn"),
    (1433, "mssql"),
    (1521, "oracle"),
    (1723, "pptp"),
    (1883, "mqtt"),
    (2049, "nfs"),
    (2181, "zookeeper"),
    (2375, "docker"),
    (2376, "docker-ssl"),
    (3000, "grafana"),
    (3128, "squid"),
    (3306, "mysql"),
    (3389, "rdp"),
    (3690, "svn"),
    (4369, "epmd"),
    (5060, "sip"),
    (5222, "xmpp-client"),
    (5432, "postgresql"),
    (5672, "amqp"),
    (5900, "vnc"),
    (5984, "couchdb"),
    (6379, "redis"),
    (6443, "kubernetes-api"),
    (6667, "irc"),
    (8000, "http-alt"),
    (8008, "http-alt"),
    (8080, "http-proxy"),
    (8081, "http-alt"),
    (8443, "https-alt"),
    (8888, "http-alt"),
    (9042, "cassandra"),
    (9090, "prometheus"),
    (9092, "kafka"),
    (9200, "elasticsearch"),
    (9418, "git"),
    (10000, "webmin"),
    (11211, "memcached"),
    (15672, "rabbitmq-mgmt"),
    (27017, "mongodb"),
];

/// Immutable signature and port tables used to label open ports.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    signatures: Vec<Signature>,
    ports: HashMap<u16, &'static str>,
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::new(SIGNATURES.to_vec(), PORT_SERVICES.iter().copied().collect())
    }
}

impl ServiceCatalog {
    /// Build a catalog from explicit tables. Signature order is match priority.
    pub fn new(signatures: Vec<Signature>, ports: HashMap<u16, &'static str>) -> Self {
        Self { signatures, ports }
    }

    /// Label a port: banner signature first, port table second.
    ///
    /// `None` means "unknown", never an error.
    pub fn identify(&self, port: Port, banner: Option<&str>) -> Option<&'static str> {
        banner
            .and_then(|b| self.match_signature(b))
            .map(|sig| sig.service)
            .or_else(|| self.port_service(port))
    }

    /// Look up the conventional service for a port.
    pub fn port_service(&self, port: Port) -> Option<&'static str> {
        self.ports.get(&port.as_u16()).copied()
    }

    /// Extract a version token using the signature that matches `banner`.
    pub fn version(&self, banner: &str) -> Option<String> {
        let sig = self.match_signature(banner)?;
        // ASCII lowercasing keeps byte offsets aligned with the original.
        let lowered = banner.to_ascii_lowercase();

        let token = match sig.version {
            VersionRule::None => return None,
            VersionRule::After(marker) => {
                let start = lowered.find(marker)? + marker.len();
                let token: String = banner[start..]
                    .chars()
                    .take_while(|c| {
                        !c.is_whitespace() && !matches!(c, '(' | ')' | ',' | ';' | '"')
                    })
                    .collect();
                token.trim_end_matches(['.', '-', ':']).to_string()
            }
            VersionRule::Before(marker) => {
                let end = lowered.find(marker)?;
                let head = &banner[..end];
                let start = head
                    .char_indices()
                    .rev()
                    .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
                    .map_or(0, |(i, c)| i + c.len_utf8());
                head[start..].trim_matches('.').to_string()
            }
        };

        (!token.is_empty()).then_some(token)
    }

    fn match_signature(&self, banner: &str) -> Option<&Signature> {
        let lowered = banner.to_ascii_lowercase();
        self.signatures.iter().find(|sig| sig.matches(&lowered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(n: u16) -> Port {
        Port::new(n).unwrap()
    }

    #[test]
    fn test_port_fallback() {
        let catalog = ServiceCatalog::default();
        assert_eq!(catalog.identify(port(22), None), Some("ssh"));
        assert_eq!(catalog.identify(port(80), None), Some("http"));
        assert_eq!(catalog.identify(port(3306), None), Some("mysql"));
    }

    #[test]
    fn test_unknown_port() {
        let catalog = ServiceCatalog::default();
        assert_eq!(catalog.identify(port(9999), None), None);
        assert_eq!(catalog.identify(port(9999), Some("\x01\x02 nothing useful")), None);
    }

    #[test]
    fn test_banner_beats_port() {
        let catalog = ServiceCatalog::default();
        let banner = "SSH-2.0-OpenSSH_8.9p1 Ubuntu-3ubuntu0.6";
        assert_eq!(catalog.identify(port(2222), Some(banner)), Some("OpenSSH"));
        assert_eq!(catalog.identify(port(80), Some(banner)), Some("OpenSSH"));
        assert_eq!(catalog.version(banner).as_deref(), Some("8.9p1"));
    }

    #[test]
    fn test_match_is_case_insensitive_and_ordered() {
        let catalog = ServiceCatalog::default();
        let banner = "HTTP/1.1 200 OK Server: NGINX/1.18.0 (Ubuntu) Date: today";
        assert_eq!(catalog.identify(port(8080), Some(banner)), Some("nginx"));
        assert_eq!(catalog.version(banner).as_deref(), Some("1.18.0"));

        let bare = "HTTP/1.0 404 Not Found Content-Length: 0";
        assert_eq!(catalog.identify(port(8080), Some(bare)), Some("http"));
        assert_eq!(catalog.version(bare), None);
    }

    #[test]
    fn test_ftp_and_smtp_banners() {
        let catalog = ServiceCatalog::default();
        let ftp = "220 (vsFTPd 3.0.5)";
        assert_eq!(catalog.identify(port(21), Some(ftp)), Some("vsftpd"));
        assert_eq!(catalog.version(ftp).as_deref(), Some("3.0.5"));

        let smtp = "220 mail.example.com ESMTP Postfix (Debian/GNU)";
        assert_eq!(catalog.identify(port(25), Some(smtp)), Some("Postfix"));
        assert_eq!(catalog.version(smtp), None);
    }

    #[test]
    fn test_custom_tables() {
        let catalog = ServiceCatalog::new(
            vec![Signature::versioned("acme", "AcmeD", "acme/")],
            HashMap::from([(4000, "acme-admin")]),
        );
        assert_eq!(catalog.identify(port(4000), None), Some("acme-admin"));
        assert_eq!(catalog.identify(port(22), None), None);
        assert_eq!(catalog.identify(port(1), Some("ACME/2.1 ready")), Some("AcmeD"));
        assert_eq!(catalog.version("ACME/2.1 ready").as_deref(), Some("2.1"));
    }

    #[test]
    fn test_ssh_text_inside_http_response() {
        let catalog = ServiceCatalog::default();
        let redirect =
            "HTTP/1.1 301 Moved Permanently Server: nginx/1.24.0 Location: http://h/ssh-keys/";
        assert_eq!(catalog.identify(port(80), Some(redirect)), Some("nginx"));
        assert_eq!(catalog.version(redirect).as_deref(), Some("1.24.0"));

        let jenkins =
            "HTTP/1.1 403 Forbidden X-SSH-Endpoint: ci.example.com:2222 X-Jenkins: 2.440";
        assert_eq!(catalog.identify(port(8080), Some(jenkins)), Some("http"));
        assert_eq!(catalog.version(jenkins), None);
    }

    #[test]
    fn test_generic_ssh_needs_leading_protocol_line() {
        let catalog = ServiceCatalog::default();
        let banner = "SSH-2.0-RomSShell_5.40";
        assert_eq!(catalog.identify(port(22), Some(banner)), Some("SSH Server"));
        assert_eq!(catalog.version(banner).as_deref(), Some("RomSShell_5.40"));

        let legacy = "SSH-1.99-Cisco-1.25";
        assert_eq!(catalog.identify(port(22), Some(legacy)), Some("SSH Server"));

        let quoted = "220 welcome, try ssh-2.0- next door";
        assert_eq!(catalog.identify(port(21), Some(quoted)), Some("ftp"));
    }

    #[test]
    fn test_mail_greetings_anchored() {
        let catalog = ServiceCatalog::default();
        assert_eq!(catalog.identify(port(110), Some("+OK POP3 ready")), Some("pop3"));
        assert_eq!(catalog.identify(port(143), Some("* OK IMAP4rev1 ready")), Some("imap"));

        let http = "HTTP/1.0 200 OK X-Status: +ok * ok";
        assert_eq!(catalog.identify(port(110), Some(http)), Some("http"));
    }

    #[test]
    fn test_database_version_before_marker() {
        let catalog = ServiceCatalog::default();
        let mariadb = "n...5.5.5-10.6.12-MariaDB-0ubuntu0.22.04.1.";
        assert_eq!(catalog.identify(port(3306), Some(mariadb)), Some("MariaDB"));
        assert_eq!(catalog.version(mariadb).as_deref(), Some("10.6.12"));

        let mysql = "J...8.0.36-MySQL Community Server";
        assert_eq!(catalog.identify(port(3306), Some(mysql)), Some("MySQL"));
        assert_eq!(catalog.version(mysql).as_deref(), Some("8.0.36"));

        let bare = "J...8.0.36..mysql_native_password.";
        assert_eq!(catalog.identify(port(3306), Some(bare)), Some("MySQL"));
        assert_eq!(catalog.version(bare), None);
    }
}
