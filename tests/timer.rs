use stepboy::interrupt::IF_ADDR;
use stepboy::mmu::{DIV, Memory, Mmu, TAC, TIMA, TMA};
use stepboy::timer::Timer;

#[test]
fn div_increment() {
    let mut t = Timer::new();
    let mut mem = Memory::new();
    t.step(255, &mut mem);
    assert_eq!(mem.get(DIV), 0);
    t.step(1, &mut mem);
    assert_eq!(mem.get(DIV), 1);
    assert_eq!(mem.get(IF_ADDR), 0);
}

#[test]
fn div_resets_on_write() {
    let mut mmu = Mmu::new();
    for _ in 0..100 {
        mmu.tick(100);
    }
    assert_ne!(mmu.read_byte(DIV), 0);
    mmu.write_byte(DIV, 0x12);
    assert_eq!(mmu.read_byte(DIV), 0);
    assert_eq!(mmu.timer.div_counter, 0);
}

#[test]
fn tima_increments_once_per_period() {
    let mut t = Timer::new();
    let mut mem = Memory::new();
    mem.set(TAC, 0x04); // enabled, 1024-cycle period
    t.step(1023, &mut mem);
    assert_eq!(mem.get(TIMA), 0);
    t.step(1, &mut mem);
    assert_eq!(mem.get(TIMA), 1);
    t.step(1024, &mut mem);
    assert_eq!(mem.get(TIMA), 2);

    mem.set(TAC, 0x05); // 16-cycle period
    t.step(64, &mut mem);
    assert_eq!(mem.get(TIMA), 6);
}

#[test]
fn overflow_reads_zero_for_four_cycles() {
    let mut t = Timer::new();
    let mut mem = Memory::new();
    mem.set(TAC, 0x04);
    mem.set(TIMA, 0xFF);
    mem.set(TMA, 0xAB);

    t.step(1024, &mut mem);
    assert_eq!(mem.get(TIMA), 0);
    assert_eq!(mem.get(IF_ADDR) & 0x04, 0x04);
    assert!(t.reload_pending());

    for _ in 0..3 {
        t.step(1, &mut mem);
        assert_eq!(mem.get(TIMA), 0);
    }
    t.step(1, &mut mem);
    assert_eq!(mem.get(TIMA), 0xAB);
    assert!(!t.reload_pending());
}

#[test]
fn disabled_timer_keeps_divider_running() {
    let mut t = Timer::new();
    let mut mem = Memory::new();
    mem.set(TAC, 0x01);
    t.step(4096, &mut mem);
    assert_eq!(mem.get(TIMA), 0);
    assert_eq!(mem.get(DIV), 16);
}
