#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut parser = dertok::Parser::new(data);
    let mut buf = [0u8; 64];
    while !parser.eof() {
        let token = match parser.next() {
            Ok(token) => token,
            Err(_) => {
                if parser.ascend(1).is_err() {
                    break;
                }
                continue;
            }
        };

        let _ = dertok::int::<i64>(&token);
        let _ = dertok::boolean(&token);
        let _ = dertok::string(&token, &mut buf);
        let _ = dertok::string_str(&token, &mut buf);
        let _ = dertok::bitstring(&token, &mut buf);
        let _ = dertok::time(&token);
        let _ = dertok::Oid::from_token(&token);

        if token.is_constructed() && parser.descend().is_err() {
            parser.skip_children();
        }
    }
});
