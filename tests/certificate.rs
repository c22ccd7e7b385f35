use data_encoding::HEXUPPER;
use dertok::{
    bitstring, int, string_eq, string_str, tag, time, type_name, Class, Oid, Parser, Token,
};

// openssl req -x509 -newkey ec -pkeyopt ec_paramgen_curve:prime256v1 \
//     -subj "/C=US/O=Example Org/CN=example.test" -set_serial 4660 -days 3650
const CERT: &str = include_str!("data/self_signed_p256.pem");

const ECDSA_WITH_SHA256: &[u32] = &[1, 2, 840, 10045, 4, 3, 2];
const EC_PUBLIC_KEY: &[u32] = &[1, 2, 840, 10045, 2, 1];
const PRIME256V1: &[u32] = &[1, 2, 840, 10045, 3, 1, 7];
const SUBJECT_KEY_IDENTIFIER: &[u32] = &[2, 5, 29, 14];

fn der() -> Vec<u8> {
    pem::parse(CERT).expect("pem").contents().to_vec()
}

fn expect_sequence<'a>(parser: &mut Parser<'a>) -> Token<'a> {
    let token = parser.next().expect("token");
    assert!(token.is_sequence(), "got {}", type_name(token.class(), token.tag()));
    token
}

fn read_oid(parser: &mut Parser) -> Oid {
    let token = parser.next().expect("oid token");
    assert!(token.is_oid());
    Oid::from_token(&token).expect("oid")
}

// Collects the (type, value) pairs of a Name.
fn read_name(parser: &mut Parser) -> Vec<(String, String)> {
    let name = expect_sequence(parser);
    parser.descend().unwrap();

    let mut attributes = Vec::new();
    while !parser.eot(&name) {
        assert!(parser.next().unwrap().is_set());
        parser.descend().unwrap();
        expect_sequence(parser);
        parser.descend().unwrap();

        let kind = read_oid(parser);
        let value = parser.next().unwrap();
        assert!(value.is_string());
        let mut buf = [0u8; 64];
        let text = string_str(&value, &mut buf).unwrap().to_string();
        attributes.push((kind.to_string(), text));

        parser.ascend(2).unwrap();
    }
    parser.ascend(1).unwrap();
    attributes
}

#[test]
fn walk_certificate() {
    let der = der();
    let mut parser = Parser::new(&der);

    let certificate = expect_sequence(&mut parser);
    assert_eq!(certificate.len(), 439);
    parser.descend().unwrap();

    let tbs = expect_sequence(&mut parser);
    parser.descend().unwrap();

    let version = parser.next().unwrap();
    assert!(version.is(Class::Context, 0));
    assert!(version.is_constructed());
    parser.descend().unwrap();
    assert_eq!(int::<i32>(&parser.next().unwrap()), Ok(2));
    parser.ascend(1).unwrap();

    assert_eq!(int::<i64>(&parser.next().unwrap()), Ok(4660));

    expect_sequence(&mut parser);
    parser.descend().unwrap();
    assert!(read_oid(&mut parser).eq_arcs(ECDSA_WITH_SHA256));
    parser.ascend(1).unwrap();

    let issuer = read_name(&mut parser);

    let validity = expect_sequence(&mut parser);
    parser.descend().unwrap();
    let not_before = parser.next().unwrap();
    assert!(not_before.is_time());
    assert_eq!(time(&not_before), Ok(1_792_209_281));
    assert_eq!(time(&parser.next().unwrap()), Ok(2_107_569_281));
    assert!(parser.eot(&validity));
    parser.ascend(1).unwrap();

    let subject = read_name(&mut parser);
    assert_eq!(issuer, subject);
    assert_eq!(
        subject,
        [
            ("2.5.4.6".to_string(), "US".to_string()),
            ("2.5.4.10".to_string(), "Example Org".to_string()),
            ("2.5.4.3".to_string(), "example.test".to_string()),
        ]
    );

    expect_sequence(&mut parser);
    parser.descend().unwrap();
    expect_sequence(&mut parser);
    parser.descend().unwrap();
    assert!(read_oid(&mut parser).eq_arcs(EC_PUBLIC_KEY));
    assert!(read_oid(&mut parser).eq_arcs(PRIME256V1));
    parser.ascend(1).unwrap();

    let key = parser.next().unwrap();
    let mut point = [0u8; 65];
    let point = bitstring(&key, &mut point).unwrap();
    assert_eq!(point.len(), 65);
    // uncompressed point marker 0x04, bit reversed
    assert_eq!(point[0], 0x20);
    parser.ascend(1).unwrap();

    let extensions = parser.next().unwrap();
    assert!(extensions.is(Class::Context, 3));
    parser.skip_children();
    assert!(parser.eot(&tbs));
    parser.ascend(1).unwrap();

    expect_sequence(&mut parser);
    parser.descend().unwrap();
    assert!(read_oid(&mut parser).eq_arcs(ECDSA_WITH_SHA256));
    parser.ascend(1).unwrap();

    let signature = parser.next().unwrap();
    assert!(signature.is(Class::Universal, tag::BIT_STRING));
    assert_eq!(signature.len(), 72);
    assert!(parser.eot(&certificate));

    parser.ascend(1).unwrap();
    assert!(parser.eof());
}

#[test]
fn raw_tbs_matches_input() {
    let der = der();
    let mut parser = Parser::new(&der);
    expect_sequence(&mut parser);
    parser.descend().unwrap();
    let tbs = expect_sequence(&mut parser);

    // the signed bytes start after the 4 byte outer and tbs headers
    assert_eq!(tbs.raw(), &der[8..8 + 349]);
}

#[test]
fn subject_key_identifier() {
    let der = der();
    let mut parser = Parser::new(&der);

    expect_sequence(&mut parser);
    parser.descend().unwrap();
    expect_sequence(&mut parser);
    parser.descend().unwrap();

    // skip to the extensions
    let mut extensions = None;
    while extensions.is_none() {
        let token = parser.next().unwrap();
        if token.is(Class::Context, 3) {
            extensions = Some(token);
        } else {
            parser.skip_children();
        }
    }
    parser.descend().unwrap();
    let list = expect_sequence(&mut parser);
    parser.descend().unwrap();

    let mut identifier = None;
    while !parser.eot(&list) {
        expect_sequence(&mut parser);
        parser.descend().unwrap();
        if read_oid(&mut parser).eq_arcs(SUBJECT_KEY_IDENTIFIER) {
            identifier = Some(parser.next().unwrap());
        }
        parser.ascend(1).unwrap();
    }

    let identifier = identifier.expect("subject key identifier");
    assert!(identifier.is(Class::Universal, tag::OCTET_STRING));
    assert_eq!(
        identifier.raw(),
        &HEXUPPER
            .decode(b"0414B5FB00E30E544DFC11001E8777C1206B8ED98180")
            .unwrap()[..]
    );
}

#[test]
fn subject_common_name_without_copying() {
    let der = der();
    let mut parser = Parser::new(&der);

    // walk every value, descending into each constructed one
    let mut open: Vec<Token> = Vec::new();
    let mut found = 0;
    while !parser.eof() {
        if let Some(parent) = open.last() {
            if parser.eot(parent) {
                parser.ascend(1).unwrap();
                open.pop();
                continue;
            }
        }

        let token = parser.next().unwrap();
        if token.is(Class::Universal, tag::UTF8_STRING) && string_eq(&token, "example.test") {
            found += 1;
        }
        if token.is_constructed() {
            parser.descend().unwrap();
            open.push(token);
        }
    }
    // issuer and subject
    assert_eq!(found, 2);
}

#[test]
fn flat_reads_stay_at_the_top_level() {
    let der = der();
    let mut parser = Parser::new(&der);
    let certificate = expect_sequence(&mut parser);
    assert!(parser.eot(&certificate));
    assert!(parser.eof());
}

#[test]
fn truncated_certificate() {
    let der = der();
    for len in 0..der.len() {
        let mut parser = Parser::new(&der[..len]);
        // the outer length always claims more than is left
        assert!(parser.next().is_err(), "prefix of {} bytes", len);
    }
}
