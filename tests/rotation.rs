use iprot::{
    dns::InMemoryDns,
    net::{
        address::{AddressBlock, IpBlock, MultiIpBlock},
        socket::{NativeSocketFactory, SocketFactory},
    },
    rotator::{AddressSelector, CancellationToken, NoValidAddressError, Rotator, SelectContext},
    utils::{U256, rng::RngU256Ext},
};
use parking_lot::Mutex;
use rand::{SeedableRng, rngs::StdRng};
use std::{net::IpAddr, time::Duration};

/// picks uniformly random indices until a valid address is found
#[derive(Debug)]
struct RandomSelector {
    rng: Mutex<StdRng>,
    attempts: usize,
}

impl RandomSelector {
    fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            attempts: 1_000,
        }
    }
}

impl<B: AddressBlock> AddressSelector<B> for RandomSelector {
    type Error = NoValidAddressError;

    fn select_address(&self, ctx: &SelectContext<'_, B>) -> Result<IpAddr, Self::Error> {
        let block = ctx.block();
        let mut rng = self.rng.lock();
        for _ in 0..self.attempts {
            let index = rng
                .random_u256_range(U256::zero(), block.count())
                .map_err(|_err| NoValidAddressError::new())?;
            let address = block
                .get(index)
                .map_err(|_err| NoValidAddressError::new())?;
            if ctx.is_valid(address) {
                return Ok(address);
            }
        }
        Err(NoValidAddressError::new())
    }
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn pool() -> MultiIpBlock {
    MultiIpBlock::try_from_cidrs(["192.168.0.0/24", "192.168.1.0/28"]).unwrap()
}

#[test]
fn random_selection_covers_the_whole_pool() {
    let pool = pool();
    let blocks = pool.blocks().to_vec();
    let rotator = Rotator::new(pool, RandomSelector::new(7));

    let mut hits = [0usize; 2];
    for _ in 0..500 {
        let address = rotator.get_address().unwrap();
        let child = blocks
            .iter()
            .position(|block| block.contains(address))
            .unwrap();
        hits[child] += 1;
        assert_eq!(rotator.last_used_address(), Some(address));
    }
    assert!(hits[0] > 0 && hits[1] > 0, "hits: {hits:?}");
}

#[test]
fn composite_index_maps_to_child_offsets() {
    let pool = pool();
    let first = pool.blocks()[0];
    let second = pool.blocks()[1];
    assert_eq!(pool.count(), first.count() + second.count());

    let mut g = U256::zero();
    while g < pool.count() {
        let expected = if g < first.count() {
            first.get(g).unwrap()
        } else {
            second.get(g - first.count()).unwrap()
        };
        assert_eq!(pool.get(g).unwrap(), expected);
        g += U256::one();
    }
    assert_eq!(pool.get(U256::from(254u64)).unwrap(), ip("192.168.1.1"));
    assert!(pool.get(pool.count()).is_err());
}

#[test]
fn failed_addresses_are_skipped() {
    let block: IpBlock = "10.0.0.0/29".parse().unwrap();
    let rotator = Rotator::new(block, RandomSelector::new(42));
    for address in block.iter().filter(|address| *address != ip("10.0.0.4")) {
        rotator.add_failed_address(address);
    }
    for _ in 0..100 {
        assert_eq!(rotator.get_address().unwrap(), ip("10.0.0.4"));
    }
}

#[test]
fn exhausted_pool_recovers_after_clear() {
    let block: IpBlock = "10.0.0.0/30".parse().unwrap();
    let rotator = Rotator::new(block, RandomSelector::new(1));
    for address in &block {
        rotator.add_failed_address(address);
    }
    assert_eq!(rotator.get_address().unwrap_err(), NoValidAddressError::new());

    rotator.clear_failed_addresses();
    assert!(block.contains(rotator.get_address().unwrap()));
}

#[test]
fn exhausted_pool_recovers_after_expiry() {
    let block: IpBlock = "10.0.0.0/30".parse().unwrap();
    let rotator = Rotator::new(block, RandomSelector::new(2))
        .with_failed_address_ttl(Duration::from_millis(10));
    for address in &block {
        rotator.add_failed_address(address);
    }
    assert!(rotator.get_address().is_err());

    std::thread::sleep(Duration::from_millis(20));
    assert!(block.contains(rotator.get_address().unwrap()));
}

#[test]
fn selected_address_binds_a_socket() {
    let rotator = Rotator::new(
        "127.0.0.1/32".parse::<IpBlock>().unwrap(),
        RandomSelector::new(3),
    );
    let address = rotator.get_address().unwrap();
    let socket = NativeSocketFactory::new()
        .create_bound_socket(address)
        .unwrap();
    let local = socket.local_addr().unwrap().as_socket().unwrap();
    assert_eq!(local.ip(), address);
}

#[tokio::test]
async fn resolve_host_for_the_pool_family() {
    let mut dns = InMemoryDns::new();
    dns.insert("upstream.test", vec![ip("203.0.113.7"), ip("2001:db8::7")]);

    let rotator = Rotator::new(pool(), RandomSelector::new(4)).with_dns_resolver(dns);
    let entry = rotator
        .resolve_host("upstream.test", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(entry.host_name(), "upstream.test");
    assert_eq!(entry.addresses(), [ip("203.0.113.7")]);
}
