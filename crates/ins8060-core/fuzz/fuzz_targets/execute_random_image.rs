#![no_main]

use ins8060_core::{
    disassemble_range, new_address_space, ExecutionContext, MemoryBus, NullIo, Pointer, Processor,
    TraceBuffer, TraceConfig, TracePolicy,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let entry = u16::from_le_bytes([data[0], data[1]]);
    let budget = i64::from(u16::from_le_bytes([data[2], data[3]]));
    let image = &data[4..];

    let mut memory = new_address_space();
    for (addr, byte) in (entry.wrapping_add(1)..=u16::MAX).zip(image.iter().copied()) {
        memory.store(addr, byte);
    }
    let _ = disassemble_range(entry.wrapping_add(1), 16, &memory);

    let mut processor = Processor::default();
    processor.set_program_counter(entry);
    processor.state_mut().set_pointer(Pointer::P1, entry ^ 0x8000);

    let mut io = NullIo;
    let mut trace = TraceBuffer::new(TraceConfig {
        capacity: 64,
        policy: TracePolicy::Wrap,
        stop_on_illegal: false,
    });
    let mut ctx = ExecutionContext::new(&mut memory, &mut io).with_trace(&mut trace);
    let _ = processor.execute(&mut ctx, budget);
    drop(ctx);

    let mut sink = Vec::new();
    let _ = trace.dump(&mut sink);
});
