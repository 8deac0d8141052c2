use nightweb_client::query::{Command, QueryMap, decode, encode};
use proptest::prelude::*;

fn well_formed_map() -> impl Strategy<Value = QueryMap> {
    prop::collection::vec(("[a-z][a-z0-9-]{0,8}", "[A-Za-z0-9:._-]{0,12}"), 0..8)
        .prop_map(|pairs| pairs.into_iter().collect::<QueryMap>())
}

proptest! {
    #[test]
    fn decode_encode_decode_is_stable(map in well_formed_map()) {
        let encoded = encode(&map);
        let decoded = decode(&encoded);
        prop_assert_eq!(&decoded, &map);
        prop_assert_eq!(decode(&encode(&decoded)), decoded);
    }

    #[test]
    fn decode_never_panics(raw in ".{0,64}") {
        let map = decode(&raw);
        prop_assert!(map.iter().all(|(k, _)| !k.contains('&')));
    }
}

#[test]
fn command_with_type_survives_round_trip() {
    let command = Command::parse("type=post&userhash=abc&ptr-time=1700").expect("typed");
    let again = Command::parse(&command.to_query_string()).expect("typed");
    assert_eq!(again, command);
}
